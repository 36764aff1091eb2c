mod fixture;
mod golden_test;
