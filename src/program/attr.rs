use super::{AttrKind, AttributeValue, OperatorDescriptor, ProgramError};

pub trait AttrValue: Sized {
    const KIND: AttrKind;

    fn from_attr(value: &AttributeValue) -> Option<Self>;
}

impl AttrValue for i64 {
    const KIND: AttrKind = AttrKind::Int;

    fn from_attr(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl AttrValue for f32 {
    const KIND: AttrKind = AttrKind::Float;

    fn from_attr(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl AttrValue for bool {
    const KIND: AttrKind = AttrKind::Bool;

    fn from_attr(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl AttrValue for String {
    const KIND: AttrKind = AttrKind::Str;

    fn from_attr(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::Str(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl AttrValue for Vec<i64> {
    const KIND: AttrKind = AttrKind::IntList;

    fn from_attr(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::IntList(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl AttrValue for Vec<f32> {
    const KIND: AttrKind = AttrKind::FloatList;

    fn from_attr(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::FloatList(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl AttrValue for Vec<bool> {
    const KIND: AttrKind = AttrKind::BoolList;

    fn from_attr(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::BoolList(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl AttrValue for Vec<String> {
    const KIND: AttrKind = AttrKind::StrList;

    fn from_attr(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::StrList(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl OperatorDescriptor {
    // The single projection point out of the attribute union; duplicate names
    // resolve to the first match.
    pub fn attr<T: AttrValue>(&self, name: &str) -> Result<T, ProgramError> {
        let attr = self
            .attrs
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| ProgramError::AttributeNotFound {
                op: self.ty.clone(),
                name: name.to_string(),
            })?;
        T::from_attr(&attr.value).ok_or_else(|| ProgramError::AttributeTypeMismatch {
            op: self.ty.clone(),
            name: name.to_string(),
            expected: T::KIND,
        })
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::OperatorAttribute;

    fn op_with(attrs: Vec<OperatorAttribute>) -> OperatorDescriptor {
        OperatorDescriptor {
            ty: "matmul_v2".to_string(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            attrs,
        }
    }

    #[test]
    fn test_get_typed_value() {
        let op = op_with(vec![
            OperatorAttribute {
                name: "col".to_string(),
                value: AttributeValue::Int(3),
            },
            OperatorAttribute {
                name: "trans_x".to_string(),
                value: AttributeValue::Bool(true),
            },
            OperatorAttribute {
                name: "shape".to_string(),
                value: AttributeValue::IntList(vec![2, 3]),
            },
        ]);

        assert_eq!(op.attr::<i64>("col").unwrap(), 3);
        assert!(op.attr::<bool>("trans_x").unwrap());
        assert_eq!(op.attr::<Vec<i64>>("shape").unwrap(), vec![2, 3]);
    }

    #[test]
    fn test_not_found_and_mismatch_are_distinct() {
        let op = op_with(vec![OperatorAttribute {
            name: "col".to_string(),
            value: AttributeValue::Int(3),
        }]);

        assert!(matches!(
            op.attr::<i64>("row"),
            Err(ProgramError::AttributeNotFound { .. })
        ));
        assert!(matches!(
            op.attr::<bool>("col"),
            Err(ProgramError::AttributeTypeMismatch {
                expected: AttrKind::Bool,
                ..
            })
        ));
    }

    #[test]
    fn test_duplicate_names_first_match_wins() {
        let op = op_with(vec![
            OperatorAttribute {
                name: "col".to_string(),
                value: AttributeValue::Int(1),
            },
            OperatorAttribute {
                name: "col".to_string(),
                value: AttributeValue::Int(2),
            },
        ]);

        assert_eq!(op.attr::<i64>("col").unwrap(), 1);
    }
}
