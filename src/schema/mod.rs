//! Header inference.
//!
//! The header row is scanned twice. The first scan registers the role columns
//! (group name columns, the capacity column and the address column), the
//! second attaches attribute columns to the groups registered by the first.
//! The result is a [`Schema`] that row processing applies without looking at
//! header text again.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::diagnostics::{DiagnosticSink, Diagnostics};
use crate::error::{MapError, Result};

/// First header token of guardian columns.
pub const GUARDIAN_KEYWORD: &str = "Parent";
/// First header token of dependent columns.
pub const DEPENDENT_KEYWORD: &str = "Child";
/// Header of the column holding each row's address.
pub const ADDRESS_HEADER: &str = "Address";
/// Header of the column holding each row's seat count.
pub const CAPACITY_HEADER: &str = "Passenger Capacity";

/// The two kinds of named groups a header can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupRole {
    Guardian,
    Dependent,
}

impl GroupRole {
    /// Header keyword that introduces columns of this role.
    pub fn keyword(self) -> &'static str {
        match self {
            GroupRole::Guardian => GUARDIAN_KEYWORD,
            GroupRole::Dependent => DEPENDENT_KEYWORD,
        }
    }

    fn from_keyword(token: &str) -> Option<Self> {
        match token {
            GUARDIAN_KEYWORD => Some(GroupRole::Guardian),
            DEPENDENT_KEYWORD => Some(GroupRole::Dependent),
            _ => None,
        }
    }
}

/// Meaning assigned to a header column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRole {
    GroupName {
        role: GroupRole,
        group: String,
    },
    Attribute {
        role: GroupRole,
        group: String,
        field: String,
    },
    Capacity,
    Address,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRole::GroupName { role, group } => write!(f, "{} {group}", role.keyword()),
            ColumnRole::Attribute { role, group, field } => {
                write!(f, "{} {group} {field}", role.keyword())
            }
            ColumnRole::Capacity => f.write_str(CAPACITY_HEADER),
            ColumnRole::Address => f.write_str(ADDRESS_HEADER),
        }
    }
}

/// Tracks which header columns have been consumed. A column may be claimed
/// once; a second claim means the classifier matched two patterns.
#[derive(Debug, Clone)]
pub struct ColumnClaims {
    claims: Vec<Option<ColumnRole>>,
}

impl ColumnClaims {
    pub fn new(width: usize) -> Self {
        Self {
            claims: vec![None; width],
        }
    }

    /// Assigns `role` to the zero-based `column` and returns the column.
    pub fn claim(&mut self, column: usize, role: ColumnRole) -> Result<usize> {
        if column >= self.claims.len() {
            self.claims.resize(column + 1, None);
        }
        match &self.claims[column] {
            Some(first) => Err(MapError::ColumnClaimedTwice {
                column: column + 1,
                first: first.clone(),
                second: role,
            }),
            None => {
                self.claims[column] = Some(role);
                Ok(column)
            }
        }
    }

    pub fn role(&self, column: usize) -> Option<&ColumnRole> {
        self.claims.get(column).and_then(Option::as_ref)
    }

    /// Zero-based indices of the columns nobody claimed.
    pub fn unclaimed(&self) -> impl Iterator<Item = usize> + '_ {
        self.claims
            .iter()
            .enumerate()
            .filter(|(_, claim)| claim.is_none())
            .map(|(column, _)| column)
    }
}

/// Attribute column attached to a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub column: usize,
}

/// A named guardian or dependent slot repeated on every row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub role: GroupRole,
    pub name: String,
    /// Column holding the entity name.
    pub column: usize,
    /// Attribute columns in header order.
    pub fields: Vec<Field>,
}

/// Typed description of a roster header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub guardian_groups: Vec<Group>,
    pub dependent_groups: Vec<Group>,
    pub capacity_column: usize,
    pub address_column: usize,
}

impl Schema {
    /// Infers the schema from the header row. Fatal problems are written to
    /// `sink` before the error is returned.
    pub fn infer<S: AsRef<str>>(header: &[S], sink: &mut dyn DiagnosticSink) -> Result<Self> {
        let mut diag = Diagnostics::new(sink);
        let tokens: Vec<Vec<&str>> = header
            .iter()
            .map(|cell| cell.as_ref().split_whitespace().collect())
            .collect();

        check_duplicates(&tokens).map_err(|err| diag.fatal(err))?;

        let mut claims = ColumnClaims::new(tokens.len());
        let mut guardian_groups: Vec<Group> = Vec::new();
        let mut dependent_groups: Vec<Group> = Vec::new();
        let mut capacity_column = None;
        let mut address_column = None;

        for (column, cell) in tokens.iter().enumerate() {
            match cell.as_slice() {
                ["Passenger", "Capacity"] => {
                    let claimed = claims
                        .claim(column, ColumnRole::Capacity)
                        .map_err(|err| diag.fatal(err))?;
                    capacity_column = Some(claimed);
                }
                [ADDRESS_HEADER] => {
                    let claimed = claims
                        .claim(column, ColumnRole::Address)
                        .map_err(|err| diag.fatal(err))?;
                    address_column = Some(claimed);
                }
                [keyword, group] => {
                    let Some(role) = GroupRole::from_keyword(keyword) else {
                        continue;
                    };
                    let name = group.to_string();
                    let claimed = claims
                        .claim(
                            column,
                            ColumnRole::GroupName {
                                role,
                                group: name.clone(),
                            },
                        )
                        .map_err(|err| diag.fatal(err))?;
                    let group = Group {
                        role,
                        name,
                        column: claimed,
                        fields: Vec::new(),
                    };
                    match role {
                        GroupRole::Guardian => guardian_groups.push(group),
                        GroupRole::Dependent => dependent_groups.push(group),
                    }
                }
                _ => {}
            }
        }

        diag.info(format!("Found {} parent groups per row", guardian_groups.len()));
        diag.info(format!("Found {} child groups per row", dependent_groups.len()));

        let capacity_column = capacity_column
            .ok_or_else(|| diag.fatal(MapError::MissingColumn(CAPACITY_HEADER)))?;
        let address_column =
            address_column.ok_or_else(|| diag.fatal(MapError::MissingColumn(ADDRESS_HEADER)))?;

        for (column, cell) in tokens.iter().enumerate() {
            if cell.len() < 3 {
                continue;
            }
            let Some(role) = GroupRole::from_keyword(cell[0]) else {
                continue;
            };
            let groups = match role {
                GroupRole::Guardian => &mut guardian_groups,
                GroupRole::Dependent => &mut dependent_groups,
            };
            let Some(group) = groups.iter_mut().find(|group| group.name == cell[1]) else {
                return Err(diag.fatal(MapError::UnknownGroup {
                    role: role.keyword(),
                    group: cell[1].to_string(),
                    column: column + 1,
                }));
            };

            let field = cell[2..].join(" ");
            let claimed = claims
                .claim(
                    column,
                    ColumnRole::Attribute {
                        role,
                        group: group.name.clone(),
                        field: field.clone(),
                    },
                )
                .map_err(|err| diag.fatal(err))?;
            group.fields.push(Field {
                name: field,
                column: claimed,
            });
        }

        for column in claims.unclaimed() {
            let text = tokens[column].join(" ");
            if !text.is_empty() {
                debug!(column = column + 1, header = %text, "ignoring unrecognised column");
            }
        }

        Ok(Self {
            guardian_groups,
            dependent_groups,
            capacity_column,
            address_column,
        })
    }

    pub fn groups(&self, role: GroupRole) -> &[Group] {
        match role {
            GroupRole::Guardian => &self.guardian_groups,
            GroupRole::Dependent => &self.dependent_groups,
        }
    }
}

/// Blank cells count as headers too; only the run of blanks after the last
/// named column is padding from the sheet's used range.
fn check_duplicates(tokens: &[Vec<&str>]) -> Result<()> {
    let width = tokens
        .iter()
        .rposition(|cell| !cell.is_empty())
        .map_or(0, |last| last + 1);
    let mut seen = HashSet::new();
    for cell in &tokens[..width] {
        let normalised = cell.join(" ");
        if !seen.insert(normalised.clone()) {
            return Err(MapError::DuplicateHeader(normalised));
        }
    }
    Ok(())
}
