pub mod a002_school;
pub mod a003_class;
pub mod a004_user;
pub mod a005_voucher;
pub mod a006_habit_log;
pub mod a007_payment_order;
