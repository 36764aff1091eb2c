mod npy_test;
