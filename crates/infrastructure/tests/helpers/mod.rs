pub mod dns_server_mock;
pub mod scripted_transport;

#[allow(unused_imports)]
pub use dns_server_mock::{build_response, MockDnsServer, MockReply};
#[allow(unused_imports)]
pub use scripted_transport::{ScriptedFactory, Step};
