pub mod ancestry;
pub mod keep_list;
pub mod random;
pub mod related;

pub use ancestry::filter_to_ancestry;
pub use keep_list::filter_to_keep_list;
pub use random::choose_subset;
pub use related::{filter_to_unrelated, DEFAULT_KINSHIP_CUTOFF};
