pub mod message_builder;
pub mod reassembler;
pub mod response_parser;

pub use message_builder::MessageBuilder;
pub use reassembler::Reassembler;
pub use response_parser::ResponseParser;
