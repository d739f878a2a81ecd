mod paged_query_test;
mod sampling_test;
