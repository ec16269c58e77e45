use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::FileId;
use super::list::IntakeList;

/// Defines the closed set of form types together with their wire/display literals.
macro_rules! form_types {
    ($($variant:ident => $label:literal),+ $(,)?) => {
        /// Operator-assigned document form classification.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "&'static str")]
        pub enum FormType {
            $($variant),+
        }

        impl FormType {
            /// Every form type in presentation order.
            pub const ALL: &'static [FormType] = &[$(FormType::$variant),+];

            pub const fn label(self) -> &'static str {
                match self {
                    $(FormType::$variant => $label),+
                }
            }
        }

        impl FromStr for FormType {
            type Err = InvalidFormType;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($label => Ok(FormType::$variant),)+
                    other => Err(InvalidFormType(other.to_string())),
                }
            }
        }
    };
}

form_types! {
    None => "None",
    W2 => "W2",
    Mis1098 => "MIS1098",
    E1098 => "E1098",
    T1098 => "T1098",
    Misc1099 => "MISC1099",
    Nec1099 => "NEC1099",
    Div1099 => "DIV1099",
    Int1099 => "INT1099",
    Sa1099 => "SA1099",
    Q1099 => "Q1099",
    A1099 => "A1099",
    B1099 => "B1099",
    C1099 => "C1099",
    Cap1099 => "CAP1099",
    G1099 => "G1099",
    H1099 => "H1099",
    K1099 => "K1099",
    Ls1099 => "LS1099",
    Ltc1099 => "LTC1099",
    Oid1099 => "OID1099",
    Patr1099 => "PATR1099",
    Qa1099 => "QA1099",
    R1099 => "R1099",
    S1099 => "S1099",
    Sb1099 => "SB1099",
    ScheduleK1 => "K1-1065",
}

impl FormType {
    /// Files classified `None` are uploaded but never sent through extraction.
    pub const fn is_extractable(self) -> bool {
        !matches!(self, FormType::None)
    }
}

impl Default for FormType {
    fn default() -> Self {
        FormType::None
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<String> for FormType {
    type Error = InvalidFormType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FormType> for &'static str {
    fn from(value: FormType) -> Self {
        value.label()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a recognised form type")]
pub struct InvalidFormType(pub String);

impl IntakeList {
    /// Assign a form type to one file. Returns whether a file was updated; an id that has
    /// already left the list is ignored.
    pub fn set_form_type(&mut self, id: &FileId, form_type: FormType) -> bool {
        match self.get_mut(id) {
            Some(entity) => {
                entity.form_type = form_type;
                debug!(file_id = %id, form_type = %form_type, "form type assigned");
                true
            }
            None => {
                debug!(file_id = %id, "form type ignored for missing file");
                false
            }
        }
    }
}
