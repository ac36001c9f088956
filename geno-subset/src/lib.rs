pub mod pipeline; // read -> select -> write glue
pub mod select; // sample selection operations
