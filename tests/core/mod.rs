mod debug_logger_tests;
mod probe_chain_tests;
mod probe_strategy_tests;
