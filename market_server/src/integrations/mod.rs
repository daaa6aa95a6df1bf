pub mod mailer;
pub mod razorpay;

pub use mailer::LogMailer;
pub use razorpay::RazorpayGateway;
