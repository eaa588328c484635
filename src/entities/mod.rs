//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod expense;
pub mod guest_meal;
pub mod market_duty;
pub mod meal;
pub mod member;
pub mod monthly_summary;
pub mod notification;

// Re-export specific types to avoid conflicts
pub use expense::{Column as ExpenseColumn, Entity as Expense, Model as ExpenseModel};
pub use guest_meal::{Column as GuestMealColumn, Entity as GuestMeal, Model as GuestMealModel};
pub use market_duty::{Column as MarketDutyColumn, Entity as MarketDuty, Model as MarketDutyModel};
pub use meal::{Column as MealColumn, Entity as Meal, Model as MealModel};
pub use member::{Column as MemberColumn, Entity as Member, Model as MemberModel};
pub use monthly_summary::{
    Column as MonthlySummaryColumn, Entity as MonthlySummary, Model as MonthlySummaryModel,
};
pub use notification::{
    Column as NotificationColumn, Entity as Notification, Model as NotificationModel,
};
