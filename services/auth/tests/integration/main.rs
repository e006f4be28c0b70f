mod helpers;
mod login_test;
mod register_test;
