// Module exports for preference state
pub mod ordering;            // Rank-by-stored-order logic
pub mod storage;             // Key-value persistence adapters
pub mod machine_order;       // Machine display order
pub mod cwd_group_order;     // Per-machine group order
pub mod group_names;         // Group labels
