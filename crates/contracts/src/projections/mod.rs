pub mod p900_habit_monitoring;
