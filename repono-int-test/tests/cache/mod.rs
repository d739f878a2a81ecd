mod cache_factory_test;
