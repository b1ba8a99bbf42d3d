mod export_tests;
mod renderer_tests;
