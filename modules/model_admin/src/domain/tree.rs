use crate::domain::error::DomainError;
use crate::domain::ports::SiblingPosition;

/// Requested placement of a new record in a tree. Anchors are raw pks as
/// received; the service coerces and looks them up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreePosition {
    Root,
    Child { parent: String },
    Sibling { sibling: String, pos: SiblingPosition },
}

impl TreePosition {
    /// Empty values count as absent.
    pub fn from_params(
        parent_id: Option<&str>,
        sibling_id: Option<&str>,
        pos: Option<&str>,
    ) -> Result<Self, DomainError> {
        fn present(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|s| !s.is_empty())
        }
        match (present(parent_id), present(sibling_id), present(pos)) {
            (Some(_), Some(_), _) => Err(DomainError::validation(
                "parent_id",
                "parent_id and sibling_id cannot be combined",
            )),
            (Some(_), None, Some(_)) | (None, None, Some(_)) => Err(DomainError::validation(
                "pos",
                "pos is only valid together with sibling_id",
            )),
            (Some(parent), None, None) => Ok(TreePosition::Child {
                parent: parent.to_owned(),
            }),
            (None, Some(sibling), pos) => {
                let pos = match pos {
                    None => SiblingPosition::Last,
                    Some("left") => SiblingPosition::Left,
                    Some("right") => SiblingPosition::Right,
                    Some(other) => {
                        return Err(DomainError::validation(
                            "pos",
                            format!("'{other}' is not one of left, right"),
                        ))
                    }
                };
                Ok(TreePosition::Sibling {
                    sibling: sibling.to_owned(),
                    pos,
                })
            }
            (None, None, None) => Ok(TreePosition::Root),
        }
    }
}
