// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// Workflow coordination only:
//   - no model math (Layer 5)
//   - no argument parsing (Layer 1)
//   - no direct file or network access (Layers 4 and 6)

// Request/response question answering
pub mod ask_use_case;

// Read-loop driver over the pipeline
pub mod session;
