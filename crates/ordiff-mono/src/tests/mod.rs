mod adapter_test;
mod shutdown_handling_test;
