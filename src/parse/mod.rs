pub mod board_parser;
pub mod board_serializer;

pub use board_parser::{parse_board, parse_title_and_tags, slugify};
pub use board_serializer::serialize_board;
