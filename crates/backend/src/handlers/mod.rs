pub mod a001_package;
pub mod a003_class;
pub mod a004_user;
pub mod a006_habit_log;
pub mod admin;
pub mod p900_habit_monitoring;
pub mod u501_create_transaction;
pub mod u502_register_school;
pub mod u503_confirm_payment;
