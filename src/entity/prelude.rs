pub use super::attendance_record::Entity as AttendanceRecord;
pub use super::employee::Entity as Employee;
pub use super::entreprise::Entity as Entreprise;
pub use super::payment::Entity as Payment;
pub use super::user::Entity as User;
