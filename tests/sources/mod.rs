mod snapshot_tests;
