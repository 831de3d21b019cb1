//! Group operations

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::{enum_column, from_millis, to_millis, Database};
use crate::error::{Error, Result};
use crate::models::{Group, GroupMember, GroupRole};

fn load_members(conn: &Connection, group_id: i64) -> Result<Vec<GroupMember>> {
    let mut stmt = conn.prepare(
        "SELECT user_id, role, joined_at FROM group_members WHERE group_id = ? ORDER BY joined_at, user_id",
    )?;
    let members = stmt
        .query_map(params![group_id], |row| {
            Ok(GroupMember {
                user_id: row.get(0)?,
                role: enum_column(row, 1)?,
                joined_at: from_millis(row.get(2)?),
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(members)
}

impl Database {
    /// Create a group; the creator joins as admin, other members as members
    pub fn create_group(
        &self,
        name: &str,
        description: Option<&str>,
        created_by: i64,
        member_ids: &[i64],
    ) -> Result<Group> {
        if name.trim().is_empty() {
            return Err(Error::InvalidData("Group name is required".into()));
        }

        let now = to_millis(Utc::now());
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO expense_groups (name, description, created_by, created_at) VALUES (?, ?, ?, ?)",
            params![name.trim(), description, created_by, now],
        )?;
        let group_id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO group_members (group_id, user_id, role, joined_at) VALUES (?, ?, ?, ?)",
            params![group_id, created_by, GroupRole::Admin.as_str(), now],
        )?;
        for &user_id in member_ids.iter().filter(|&&id| id != created_by) {
            tx.execute(
                "INSERT OR IGNORE INTO group_members (group_id, user_id, role, joined_at) VALUES (?, ?, ?, ?)",
                params![group_id, user_id, GroupRole::Member.as_str(), now],
            )?;
        }
        tx.commit()?;
        drop(conn);

        tracing::debug!(group_id, name, "Created group");
        self.get_group(group_id)?
            .ok_or_else(|| Error::NotFound(format!("Group {}", group_id)))
    }

    pub fn get_group(&self, id: i64) -> Result<Option<Group>> {
        let conn = self.conn()?;
        let group = conn
            .query_row(
                "SELECT id, name, description, created_by, created_at FROM expense_groups WHERE id = ?",
                params![id],
                |row| {
                    Ok(Group {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                        created_by: row.get(3)?,
                        members: Vec::new(),
                        created_at: from_millis(row.get(4)?),
                    })
                },
            )
            .optional()?;

        match group {
            Some(mut group) => {
                group.members = load_members(&conn, group.id)?;
                Ok(Some(group))
            }
            None => Ok(None),
        }
    }

    /// Groups the user belongs to, newest first
    pub fn list_groups_for_user(&self, user_id: i64) -> Result<Vec<Group>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT g.id, g.name, g.description, g.created_by, g.created_at
            FROM expense_groups g
            JOIN group_members m ON m.group_id = g.id
            WHERE m.user_id = ?
            ORDER BY g.created_at DESC, g.id DESC
            "#,
        )?;

        let mut groups = stmt
            .query_map(params![user_id], |row| {
                Ok(Group {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    created_by: row.get(3)?,
                    members: Vec::new(),
                    created_at: from_millis(row.get(4)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for group in &mut groups {
            group.members = load_members(&conn, group.id)?;
        }
        Ok(groups)
    }

    pub fn is_group_member(&self, group_id: i64, user_id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM group_members WHERE group_id = ? AND user_id = ?",
            params![group_id, user_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
