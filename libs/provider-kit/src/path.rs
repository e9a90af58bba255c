use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Attr(String),
    Index(usize),
}

/// Location of an attribute inside a resource, e.g. `allowed_groups[1].group_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttrPath(Vec<Step>);

impl AttrPath {
    /// Path to a top-level attribute.
    #[must_use]
    pub fn root(name: impl Into<String>) -> Self {
        Self(vec![Step::Attr(name.into())])
    }

    #[must_use]
    pub fn attr(&self, name: impl Into<String>) -> Self {
        let mut steps = self.0.clone();
        steps.push(Step::Attr(name.into()));
        Self(steps)
    }

    #[must_use]
    pub fn index(&self, i: usize) -> Self {
        let mut steps = self.0.clone();
        steps.push(Step::Index(i));
        Self(steps)
    }

    /// Name of the last attribute step.
    #[must_use]
    pub fn leaf(&self) -> Option<&str> {
        self.0.iter().rev().find_map(|s| match s {
            Step::Attr(a) => Some(a.as_str()),
            Step::Index(_) => None,
        })
    }
}

impl fmt::Display for AttrPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.0.iter().enumerate() {
            match step {
                Step::Attr(a) if i == 0 => f.write_str(a)?,
                Step::Attr(a) => write!(f, ".{a}")?,
                Step::Index(n) => write!(f, "[{n}]")?,
            }
        }
        Ok(())
    }
}
