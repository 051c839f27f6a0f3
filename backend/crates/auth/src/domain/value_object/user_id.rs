use kernel::id::{Id, markers};

pub type UserId = Id<markers::User>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_generate() {
        let user_id = UserId::generate();
        assert_eq!(user_id.as_str().len(), 21);
    }

    #[test]
    fn test_user_id_parse_token_subject() {
        let user_id = UserId::parse("V1StGXR8_Z5jdHi6B-myT").unwrap();
        assert_eq!(user_id.as_str(), "V1StGXR8_Z5jdHi6B-myT");
    }
}
