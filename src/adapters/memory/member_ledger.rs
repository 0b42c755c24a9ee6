use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use super::InMemoryLedger;
use crate::domain::{Member, MemberId};
use crate::ports::{
    LedgerError, MemberLedger, MemberSortField, PageRequest, Result, SortOrder,
};

fn compare(a: &Member, b: &Member, field: MemberSortField) -> Ordering {
    match field {
        MemberSortField::Code => a.code.cmp(&b.code),
        MemberSortField::Name => a.name.cmp(&b.name).then_with(|| a.code.cmp(&b.code)),
    }
}

#[async_trait]
impl MemberLedger for InMemoryLedger {
    async fn insert_member(&self, member: Member) -> Result<Member> {
        let mut state = self.lock()?;
        if state.members.values().any(|m| m.name == member.name) {
            return Err(LedgerError::DuplicateKey("members_name_key".to_string()));
        }
        if state.members.values().any(|m| m.code == member.code) {
            return Err(LedgerError::DuplicateKey("members_code_key".to_string()));
        }
        state.members.insert(member.member_id, member.clone());
        Ok(member)
    }

    async fn find_member(&self, member_id: MemberId) -> Result<Option<Member>> {
        Ok(self.lock()?.members.get(&member_id).cloned())
    }

    async fn find_member_by_name(&self, name: &str) -> Result<Option<Member>> {
        Ok(self
            .lock()?
            .members
            .values()
            .find(|m| m.name == name)
            .cloned())
    }

    async fn list_members(&self, request: &PageRequest<MemberSortField>) -> Result<Vec<Member>> {
        let mut members: Vec<Member> = self.lock()?.members.values().cloned().collect();
        members.sort_by(|a, b| {
            let ordering = compare(a, b, request.sort_by);
            match request.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        Ok(members
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.limit() as usize)
            .collect())
    }

    async fn list_all_members(&self) -> Result<Vec<Member>> {
        let mut members: Vec<Member> = self.lock()?.members.values().cloned().collect();
        members.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(members)
    }

    async fn count_members(&self) -> Result<u64> {
        Ok(self.lock()?.members.len() as u64)
    }

    async fn update_member_penalty(
        &self,
        member_id: MemberId,
        penalty_until: DateTime<Utc>,
    ) -> Result<Member> {
        let mut state = self.lock()?;
        let member = state
            .members
            .get_mut(&member_id)
            .ok_or(LedgerError::StaleWrite)?;
        member.penalty_until = Some(penalty_until);
        Ok(member.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(code: &str, name: &str) -> Member {
        Member::new(code.to_string(), name.to_string(), "hash".to_string())
    }

    #[tokio::test]
    async fn test_insert_member_rejects_duplicate_name() {
        let ledger = InMemoryLedger::new();
        ledger.insert_member(member("M001", "Angga")).await.unwrap();

        let result = ledger.insert_member(member("M002", "Angga")).await;
        assert!(matches!(result, Err(LedgerError::DuplicateKey(key)) if key == "members_name_key"));
    }

    #[tokio::test]
    async fn test_list_members_sorts_and_pages() {
        let ledger = InMemoryLedger::new();
        ledger.add_member(member("M001", "Putri"));
        ledger.add_member(member("M002", "Angga"));
        ledger.add_member(member("M003", "Ferry"));

        let request = PageRequest::new(Some(1), Some(2), MemberSortField::Name, SortOrder::Asc);
        let page = ledger.list_members(&request).await.unwrap();
        let names: Vec<_> = page.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Angga", "Ferry"]);

        let request = PageRequest::new(Some(2), Some(2), MemberSortField::Code, SortOrder::Desc);
        let page = ledger.list_members(&request).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].code, "M001");
    }

    #[tokio::test]
    async fn test_update_member_penalty_overwrites() {
        let ledger = InMemoryLedger::new();
        let m = member("M001", "Angga");
        let member_id = m.member_id;
        ledger.add_member(m);

        let later = Utc::now() + chrono::Duration::days(3);
        let earlier = Utc::now() + chrono::Duration::days(1);
        ledger.update_member_penalty(member_id, later).await.unwrap();
        let updated = ledger.update_member_penalty(member_id, earlier).await.unwrap();

        assert_eq!(updated.penalty_until, Some(earlier));
    }

    #[tokio::test]
    async fn test_update_member_penalty_unknown_member() {
        let ledger = InMemoryLedger::new();
        let result = ledger.update_member_penalty(MemberId::new(), Utc::now()).await;
        assert!(matches!(result, Err(LedgerError::StaleWrite)));
    }
}
