mod fc_reference_test;
