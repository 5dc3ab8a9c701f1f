//! Flag model and validation for pseudo-yolk lines.
//!
//! A line reads `mnemonic --flag value --switch ...`. Tokens after the
//! mnemonic are collected into a [`FlagSet`], then checked against the
//! mnemonic's static [`FlagSchema`].

use crate::bytecode::errors::FlagError;

const FLAG_PREFIX: &str = "--";
const REF_OPEN: char = '<';
const REF_CLOSE: char = '>';

/// Value kind a flag accepts.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ArgKind {
    /// Presence-only switch, no value.
    None = 0,
    /// `<N>` reference literal.
    RefId,
    /// Plain integer literal.
    Num,
    /// `true`/`false` or a plain integer literal.
    Bool,
}

impl ArgKind {
    /// Human-readable description used in diagnostics.
    pub const fn describe(self) -> &'static str {
        match self {
            ArgKind::None => "no value",
            ArgKind::RefId => "a reference like <N>",
            ArgKind::Num => "an integer",
            ArgKind::Bool => "true or false",
        }
    }
}

/// A classified value token.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FlagValue {
    pub value: i64,
    pub is_reference: bool,
}

impl FlagValue {
    pub const fn reference(value: i64) -> Self {
        Self {
            value,
            is_reference: true,
        }
    }

    pub const fn literal(value: i64) -> Self {
        Self {
            value,
            is_reference: false,
        }
    }

    /// Classifies a value token: `<int>` is a reference, `true`/`false` are
    /// 1/0, any other integer is a literal. Returns `None` for anything else.
    pub fn parse(token: &str) -> Option<Self> {
        if let Some(inner) = token
            .strip_prefix(REF_OPEN)
            .and_then(|t| t.strip_suffix(REF_CLOSE))
        {
            return inner.parse::<i64>().ok().map(Self::reference);
        }

        match token {
            "true" => Some(Self::literal(1)),
            "false" => Some(Self::literal(0)),
            _ => token.parse::<i64>().ok().map(Self::literal),
        }
    }
}

/// Schema descriptor of one flag.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Flag {
    name: &'static str,
    kind: ArgKind,
}

impl Flag {
    pub const fn new(name: &'static str, kind: ArgKind) -> Self {
        Self { name, kind }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn kind(&self) -> ArgKind {
        self.kind
    }

    /// Whether `value` is acceptable for this flag's kind.
    pub fn validate(&self, value: Option<FlagValue>) -> bool {
        match (self.kind, value) {
            (ArgKind::None, value) => value.is_none(),
            (_, None) => false,
            (ArgKind::RefId, Some(v)) => v.is_reference,
            (ArgKind::Num | ArgKind::Bool, Some(v)) => !v.is_reference,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Presence {
    Required,
    Optional,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SchemaEntry {
    pub presence: Presence,
    pub flag: Flag,
}

impl SchemaEntry {
    pub const fn required(flag: Flag) -> Self {
        Self {
            presence: Presence::Required,
            flag,
        }
    }

    pub const fn optional(flag: Flag) -> Self {
        Self {
            presence: Presence::Optional,
            flag,
        }
    }
}

/// Required and optional flags of one mnemonic.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FlagSchema {
    entries: &'static [SchemaEntry],
}

impl FlagSchema {
    pub const fn new(entries: &'static [SchemaEntry]) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &'static [SchemaEntry] {
        self.entries
    }

    pub fn required(&self) -> impl Iterator<Item = &'static Flag> {
        self.with_presence(Presence::Required)
    }

    pub fn optional(&self) -> impl Iterator<Item = &'static Flag> {
        self.with_presence(Presence::Optional)
    }

    fn with_presence(&self, presence: Presence) -> impl Iterator<Item = &'static Flag> {
        self.entries
            .iter()
            .filter(move |entry| entry.presence == presence)
            .map(|entry| &entry.flag)
    }

    /// Declared flag named `name`, required or optional.
    pub fn lookup(&self, name: &str) -> Option<&'static Flag> {
        self.entries
            .iter()
            .map(|entry| &entry.flag)
            .find(|flag| flag.name() == name)
    }

    /// Checks that every required flag is present, and that every present
    /// flag is declared and carries a value of its kind.
    pub fn validate(&self, flags: &FlagSet<'_>) -> Result<(), FlagError> {
        if let Some(missing) = self.required().find(|flag| !flags.contains(flag.name())) {
            return Err(FlagError::MissingRequired {
                flag: missing.name().to_string(),
            });
        }

        for (name, value) in flags.iter() {
            let Some(flag) = self.lookup(name) else {
                return Err(FlagError::Undeclared {
                    flag: name.to_string(),
                });
            };
            if !flag.validate(value) {
                return Err(FlagError::KindMismatch {
                    flag: name.to_string(),
                    expected: flag.kind().describe(),
                });
            }
        }

        Ok(())
    }
}

/// Flags collected from one line, in first-seen order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FlagSet<'a> {
    entries: Vec<(&'a str, Option<FlagValue>)>,
}

impl<'a> FlagSet<'a> {
    /// Collects `--flag [value]` pairs from the tokens following a mnemonic.
    ///
    /// A flag directly followed by another flag, or ending the line, maps to
    /// no value. A value token with no pending flag is rejected.
    pub fn collect(tokens: &[&'a str]) -> Result<Self, FlagError> {
        let mut set = FlagSet::default();
        let mut pending: Option<&'a str> = None;

        for &token in tokens {
            if let Some(name) = token.strip_prefix(FLAG_PREFIX) {
                if let Some(previous) = pending.replace(name) {
                    set.insert(previous, None);
                }
            } else if let Some(name) = pending.take() {
                let value = FlagValue::parse(token).ok_or_else(|| FlagError::MalformedValue {
                    flag: name.to_string(),
                    token: token.to_string(),
                })?;
                set.insert(name, Some(value));
            } else {
                return Err(FlagError::StrayValue {
                    token: token.to_string(),
                });
            }
        }

        if let Some(name) = pending {
            set.insert(name, None);
        }
        Ok(set)
    }

    /// Sets `name`, replacing any earlier value.
    pub fn insert(&mut self, name: &'a str, value: Option<FlagValue>) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// `None` if the flag is absent, `Some(None)` if present without value.
    pub fn get(&self, name: &str) -> Option<Option<FlagValue>> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == name)
            .map(|(_, value)| *value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, Option<FlagValue>)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KINDS: [ArgKind; 4] = [ArgKind::None, ArgKind::RefId, ArgKind::Num, ArgKind::Bool];

    const TEST_SCHEMA: FlagSchema = FlagSchema::new(&[
        SchemaEntry::required(Flag::new("reqName", ArgKind::RefId)),
        SchemaEntry::required(Flag::new("reqNum", ArgKind::Num)),
        SchemaEntry::optional(Flag::new("optNone", ArgKind::None)),
        SchemaEntry::optional(Flag::new("optBool", ArgKind::Bool)),
    ]);

    fn check(tokens: &[&str]) -> Result<(), FlagError> {
        let set = FlagSet::collect(tokens)?;
        TEST_SCHEMA.validate(&set)
    }

    #[test]
    fn validation_matrix() {
        for kind in KINDS {
            let flag = Flag::new("f", kind);
            assert_eq!(
                flag.validate(Some(FlagValue::reference(3))),
                kind == ArgKind::RefId,
                "reference value for {kind:?}"
            );
            assert_eq!(
                flag.validate(Some(FlagValue::literal(3))),
                matches!(kind, ArgKind::Num | ArgKind::Bool),
                "literal value for {kind:?}"
            );
            assert_eq!(flag.validate(None), kind == ArgKind::None, "no value for {kind:?}");
        }
    }

    #[test]
    fn parse_value_tokens() {
        assert_eq!(FlagValue::parse("<12>"), Some(FlagValue::reference(12)));
        assert_eq!(FlagValue::parse("<-1>"), Some(FlagValue::reference(-1)));
        assert_eq!(FlagValue::parse("true"), Some(FlagValue::literal(1)));
        assert_eq!(FlagValue::parse("false"), Some(FlagValue::literal(0)));
        assert_eq!(FlagValue::parse("-42"), Some(FlagValue::literal(-42)));
        assert_eq!(FlagValue::parse("<abc>"), None);
        assert_eq!(FlagValue::parse("<12"), None);
        assert_eq!(FlagValue::parse("12abc"), None);
        assert_eq!(FlagValue::parse("TRUE"), None);
        assert_eq!(FlagValue::parse("<>"), None);
    }

    #[test]
    fn collect_pairs_flags_with_values() {
        let set = FlagSet::collect(&["--a", "<1>", "--b", "--c", "5", "--d"]).unwrap();
        assert_eq!(set.len(), 4);
        assert_eq!(set.get("a"), Some(Some(FlagValue::reference(1))));
        assert_eq!(set.get("b"), Some(None));
        assert_eq!(set.get("c"), Some(Some(FlagValue::literal(5))));
        assert_eq!(set.get("d"), Some(None));
        assert_eq!(set.get("e"), None);
    }

    #[test]
    fn collect_keeps_last_duplicate() {
        let set = FlagSet::collect(&["--val", "1", "--val", "2"]).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("val"), Some(Some(FlagValue::literal(2))));
    }

    #[test]
    fn collect_rejects_stray_value() {
        assert_eq!(
            FlagSet::collect(&["5"]),
            Err(FlagError::StrayValue {
                token: "5".to_string()
            })
        );
        assert!(matches!(
            FlagSet::collect(&["--a", "1", "2"]),
            Err(FlagError::StrayValue { .. })
        ));
    }

    #[test]
    fn collect_rejects_malformed_value() {
        assert_eq!(
            FlagSet::collect(&["--val", "forty"]),
            Err(FlagError::MalformedValue {
                flag: "val".to_string(),
                token: "forty".to_string(),
            })
        );
    }

    #[test]
    fn empty_tokens_make_empty_set() {
        let set = FlagSet::collect(&[]).unwrap();
        assert!(set.is_empty());
        assert!(FlagSchema::new(&[]).validate(&set).is_ok());
    }

    #[test]
    fn schema_accepts_required_and_optional() {
        assert!(check(&["--reqName", "<1>", "--reqNum", "2"]).is_ok());
        assert!(check(&["--reqNum", "2", "--reqName", "<1>", "--optNone"]).is_ok());
        assert!(check(&["--optNone", "--reqName", "<1>", "--reqNum", "2", "--optBool", "false"]).is_ok());
    }

    #[test]
    fn schema_rejects_missing_required() {
        assert_eq!(
            check(&["--reqName", "<1>"]),
            Err(FlagError::MissingRequired {
                flag: "reqNum".to_string()
            })
        );
    }

    #[test]
    fn schema_rejects_undeclared() {
        assert_eq!(
            check(&["--reqName", "<1>", "--reqNum", "2", "--other"]),
            Err(FlagError::Undeclared {
                flag: "other".to_string()
            })
        );
    }

    #[test]
    fn schema_rejects_wrong_kinds() {
        assert!(matches!(
            check(&["--reqName", "1", "--reqNum", "2"]),
            Err(FlagError::KindMismatch { .. })
        ));
        assert!(matches!(
            check(&["--reqName", "<1>", "--reqNum", "<2>"]),
            Err(FlagError::KindMismatch { .. })
        ));
        assert!(matches!(
            check(&["--reqName", "<1>", "--reqNum", "2", "--optNone", "1"]),
            Err(FlagError::KindMismatch { .. })
        ));
        assert!(matches!(
            check(&["--reqName", "<1>", "--reqNum", "2", "--optBool"]),
            Err(FlagError::KindMismatch { .. })
        ));
        assert!(matches!(
            check(&["--reqName", "--reqNum", "2"]),
            Err(FlagError::KindMismatch { .. })
        ));
    }

    #[test]
    fn schema_partitions_entries() {
        let required: Vec<_> = TEST_SCHEMA.required().map(Flag::name).collect();
        let optional: Vec<_> = TEST_SCHEMA.optional().map(Flag::name).collect();
        assert_eq!(required, vec!["reqName", "reqNum"]);
        assert_eq!(optional, vec!["optNone", "optBool"]);
        assert_eq!(TEST_SCHEMA.lookup("optBool").map(Flag::kind), Some(ArgKind::Bool));
        assert!(TEST_SCHEMA.lookup("missing").is_none());
    }
}
