mod concurrency_test;
mod repository_factory_test;
mod repository_negative_test;
mod repository_test;
