mod compare_test;
