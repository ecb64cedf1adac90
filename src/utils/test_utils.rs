//! In-memory collaborators for assembler and listing tests.
