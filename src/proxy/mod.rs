pub mod dispatch;
pub mod upstream;
