/// Token marking that the last argument may repeat
const UNBOUNDED_MARKER: &str = "...";

/// How many positional arguments a script accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentValidator {
    /// No positional arguments at all
    None,
    /// Exactly this many arguments
    Exact(usize),
    /// Between `min` and `max` arguments, both inclusive
    Range(usize, usize),
    /// At least `min` arguments
    Minimum(usize),
    /// Any number of arguments
    Unbounded,
}

impl ArgumentValidator {
    /// Whether `count` positional arguments satisfy this policy.
    #[must_use]
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            ArgumentValidator::None => count == 0,
            ArgumentValidator::Exact(n) => count == n,
            ArgumentValidator::Range(min, max) => (min..=max).contains(&count),
            ArgumentValidator::Minimum(min) => count >= min,
            ArgumentValidator::Unbounded => true,
        }
    }

    /// Inclusive lower bound and optional upper bound, `None` if the command
    /// takes no positional arguments.
    #[must_use]
    pub fn bounds(&self) -> Option<(usize, Option<usize>)> {
        match *self {
            ArgumentValidator::None => None,
            ArgumentValidator::Exact(n) => Some((n, Some(n))),
            ArgumentValidator::Range(min, max) => Some((min, Some(max))),
            ArgumentValidator::Minimum(min) => Some((min, None)),
            ArgumentValidator::Unbounded => Some((0, None)),
        }
    }
}

/// A parsed `# usage: <name> [<token> ...]` annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Usage {
    /// Name the command is invoked by
    pub name: String,
    /// Tokens after the name, as written
    pub tokens: Vec<String>,
    pub validator: ArgumentValidator,
}

impl Usage {
    /// Parse the text following `# usage: `. Returns `None` when it has no
    /// tokens at all.
    #[must_use]
    pub fn parse(line: &str) -> Option<Usage> {
        let mut tokens = line.split(' ').filter(|token| !token.is_empty());
        let name = tokens.next()?.to_string();
        let tokens: Vec<String> = tokens.map(str::to_string).collect();
        let validator = compile(&tokens);
        Some(Usage {
            name,
            tokens,
            validator,
        })
    }

    /// The argument part of the usage line, e.g. `foo [bar] ...`
    #[must_use]
    pub fn synopsis(&self) -> String {
        self.tokens.join(" ")
    }
}

fn is_optional(token: &str) -> bool {
    token.len() >= 2 && token.starts_with('[') && token.ends_with(']')
}

/// Compile the argument tokens of a usage line into a validator.
fn compile(tokens: &[String]) -> ArgumentValidator {
    if tokens.is_empty() {
        return ArgumentValidator::None;
    }

    let arguments = tokens.iter().filter(|token| *token != UNBOUNDED_MARKER);
    let (optional, required): (Vec<&String>, Vec<&String>) =
        arguments.partition(|token| is_optional(token));

    if tokens.last().is_some_and(|token| token == UNBOUNDED_MARKER) {
        ArgumentValidator::Minimum(required.len())
    } else if optional.is_empty() {
        ArgumentValidator::Exact(required.len())
    } else {
        ArgumentValidator::Range(required.len(), required.len() + optional.len())
    }
}
