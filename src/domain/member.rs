use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MemberId;

/// 会員
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub member_id: MemberId,
    pub code: String,
    /// ログインに使用する一意の名前
    pub name: String,
    /// パスワードハッシュ（不透明な値として扱う）
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// ペナルティ期限（Noneはペナルティなし）
    pub penalty_until: Option<DateTime<Utc>>,
}

impl Member {
    pub fn new(code: String, name: String, password_hash: String) -> Self {
        Self {
            member_id: MemberId::new(),
            code,
            name,
            password_hash,
            penalty_until: None,
        }
    }

    /// ペナルティ期間中か
    ///
    /// 期限が現在時刻より後の場合のみペナルティ中とする。
    /// 期限ちょうどの時刻には借りられる。
    pub fn is_penalized(&self, now: DateTime<Utc>) -> bool {
        self.penalty_until.is_some_and(|until| until > now)
    }
}

/// 会員の貸出状況ビュー（読み取り専用の導出値）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberLoanSummary {
    pub member: Member,
    pub active_loans: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn member() -> Member {
        Member::new("M001".to_string(), "Angga".to_string(), "hash".to_string())
    }

    #[test]
    fn test_new_member_is_not_penalized() {
        assert!(!member().is_penalized(Utc::now()));
    }

    #[test]
    fn test_member_penalized_until_expiry() {
        let now = Utc::now();
        let member = Member {
            penalty_until: Some(now + Duration::days(3)),
            ..member()
        };

        assert!(member.is_penalized(now));
        assert!(member.is_penalized(now + Duration::days(3) - Duration::seconds(1)));
    }

    #[test]
    fn test_member_not_penalized_at_or_after_expiry() {
        let now = Utc::now();
        let member = Member {
            penalty_until: Some(now),
            ..member()
        };

        assert!(!member.is_penalized(now));
        assert!(!member.is_penalized(now + Duration::hours(1)));
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let json = serde_json::to_value(member()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["name"], "Angga");
    }
}
