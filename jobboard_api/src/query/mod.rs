mod sort;
pub use self::sort::SortDirection;

mod state;
pub use self::state::{QueryState, DEFAULT_PAGE_SIZE};
