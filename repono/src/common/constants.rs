// document constants
pub const OBJECT_ID: &str = "oId";

// wire envelope constants
pub const PAGINATION: &str = "pagination";
pub const PAGINATION_PAGE_COUNT: &str = "paginationPageCount";
pub const RESULTS: &str = "rslts";

// entity store constants
pub const MAX_STRING_PROPERTY_LENGTH: usize = 500;
pub const DEFAULT_PARENT_KIND: &str = "parentKind";
pub const DEFAULT_PARENT_NAME: &str = "parentKeyName";

// cache constants
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

// id constants
pub const ID_WIDTH: usize = 13;
