use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Attribute values reported for the artificial root node on the token and
/// tag layers.
pub const ROOT_VALUE: &str = "<root>";

/// The artificial root token at index 0 of every sentence.
///
/// It carries `<root>` on the form/lemma/tag layers and has no morphological
/// features, so feature templates addressing it behave like templates
/// addressing an ordinary unannotated token.
pub static ROOT_TOKEN: Lazy<Token> = Lazy::new(|| {
    let mut token = Token::new(ROOT_VALUE);
    token.set_lemma(Some(ROOT_VALUE));
    token.set_cpos(Some(ROOT_VALUE));
    token.set_pos(Some(ROOT_VALUE));
    token
});

/// A single token of a CoNLL-X sentence.
///
/// The head and head relation are output attributes: they are empty on
/// freshly read unannotated input and written by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    form: String,
    lemma: Option<String>,
    cpos: Option<String>,
    pos: Option<String>,
    features: IndexMap<String, String>,
    head: Option<usize>,
    head_rel: Option<String>,
}

impl Token {
    /// Create a token with the given surface form and no other attributes.
    pub fn new(form: impl Into<String>) -> Self {
        Token {
            form: form.into(),
            lemma: None,
            cpos: None,
            pos: None,
            features: IndexMap::new(),
            head: None,
            head_rel: None,
        }
    }

    /// The surface form.
    pub fn form(&self) -> &str {
        &self.form
    }

    /// The lemma, if annotated.
    pub fn lemma(&self) -> Option<&str> {
        self.lemma.as_deref()
    }

    /// The coarse-grained part-of-speech tag, if annotated.
    pub fn cpos(&self) -> Option<&str> {
        self.cpos.as_deref()
    }

    /// The fine-grained part-of-speech tag, if annotated.
    pub fn pos(&self) -> Option<&str> {
        self.pos.as_deref()
    }

    /// The morphological feature map, in annotation order.
    pub fn features(&self) -> &IndexMap<String, String> {
        &self.features
    }

    /// Look up a single morphological feature.
    pub fn feature(&self, name: &str) -> Option<&str> {
        self.features.get(name).map(String::as_str)
    }

    /// The head index, if assigned. 0 denotes attachment to the root.
    pub fn head(&self) -> Option<usize> {
        self.head
    }

    /// The relation to the head, if assigned.
    pub fn head_rel(&self) -> Option<&str> {
        self.head_rel.as_deref()
    }

    pub fn set_lemma(&mut self, lemma: Option<impl Into<String>>) {
        self.lemma = lemma.map(Into::into);
    }

    pub fn set_cpos(&mut self, cpos: Option<impl Into<String>>) {
        self.cpos = cpos.map(Into::into);
    }

    pub fn set_pos(&mut self, pos: Option<impl Into<String>>) {
        self.pos = pos.map(Into::into);
    }

    pub fn set_features(&mut self, features: IndexMap<String, String>) {
        self.features = features;
    }

    pub fn set_head(&mut self, head: Option<usize>) {
        self.head = head;
    }

    pub fn set_head_rel(&mut self, head_rel: Option<impl Into<String>>) {
        self.head_rel = head_rel.map(Into::into);
    }
}

/// An ordered sequence of tokens with the implicit root at index 0.
///
/// Token indices are 1-based throughout the crate; `token(0)` resolves to
/// the shared artificial root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    tokens: Vec<Token>,
}

impl Sentence {
    pub fn new(tokens: Vec<Token>) -> Self {
        Sentence { tokens }
    }

    /// The number of tokens, excluding the artificial root.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Look up a token by 1-based index. Index 0 yields the artificial
    /// root; indices past the end yield `None`.
    pub fn token(&self, index: usize) -> Option<&Token> {
        if index == 0 {
            Some(&ROOT_TOKEN)
        } else {
            self.tokens.get(index - 1)
        }
    }

    /// Mutable lookup by 1-based index. The root is not addressable.
    pub fn token_mut(&mut self, index: usize) -> Option<&mut Token> {
        if index == 0 {
            None
        } else {
            self.tokens.get_mut(index - 1)
        }
    }

    /// Iterate over the tokens, excluding the artificial root.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    pub fn tokens_mut(&mut self) -> impl Iterator<Item = &mut Token> {
        self.tokens.iter_mut()
    }
}

impl FromIterator<Token> for Sentence {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Sentence::new(iter.into_iter().collect())
    }
}
