pub mod u501_create_transaction;
pub mod u502_register_school;
pub mod u503_confirm_payment;
pub mod u504_provision;
