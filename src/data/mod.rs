pub mod conllx;
pub mod token;

pub use conllx::{Reader, Writer};
pub use token::{Sentence, Token, ROOT_TOKEN, ROOT_VALUE};
