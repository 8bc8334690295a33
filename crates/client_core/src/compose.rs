use shared::domain::{AdditionalSigner, SignerId, MAX_MEMO_CHARS};

use crate::signer_keys::generate_signer;

/// Memo text and co-signers being prepared for one submission.
#[derive(Debug, Default, Clone)]
pub struct ComposeSession {
    text: String,
    signers: Vec<AdditionalSigner>,
}

impl ComposeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn signers(&self) -> &[AdditionalSigner] {
        &self.signers
    }

    /// Adds a signer backed by a freshly generated keypair.
    pub fn add_signer(&mut self) -> &AdditionalSigner {
        self.push(generate_signer())
    }

    pub fn import_signer(
        &mut self,
        public_address: impl Into<String>,
        secret_material: impl Into<String>,
    ) -> &AdditionalSigner {
        self.push(AdditionalSigner::new(public_address, secret_material))
    }

    pub fn remove_signer(&mut self, id: &SignerId) -> Option<AdditionalSigner> {
        let index = self.signers.iter().position(|s| &s.local_id == id)?;
        Some(self.signers.remove(index))
    }

    /// Replaces the secret material of a signer; returns false for unknown ids.
    pub fn update_secret(&mut self, id: &SignerId, secret_material: impl Into<String>) -> bool {
        match self.signers.iter_mut().find(|s| &s.local_id == id) {
            Some(signer) => {
                signer.secret_material = secret_material.into();
                true
            }
            None => false,
        }
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Characters left before the memo limit; zero once over it.
    pub fn remaining_chars(&self) -> usize {
        MAX_MEMO_CHARS.saturating_sub(self.char_count())
    }

    /// Whether the send action should be offered at all.
    pub fn can_submit(&self) -> bool {
        !self.text.trim().is_empty()
    }

    pub fn reset(&mut self) {
        self.text.clear();
        self.signers.clear();
    }

    fn push(&mut self, signer: AdditionalSigner) -> &AdditionalSigner {
        self.signers.push(signer);
        let last = self.signers.len() - 1;
        &self.signers[last]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_remove_signers_preserve_order() {
        let mut session = ComposeSession::new();
        let first = session.add_signer().local_id.clone();
        let second = session.import_signer("Imported", "1,2,3").local_id.clone();
        let third = session.add_signer().local_id.clone();

        let removed = session.remove_signer(&second).expect("removed");
        assert_eq!(removed.public_address, "Imported");

        let ids: Vec<_> = session.signers().iter().map(|s| s.local_id.clone()).collect();
        assert_eq!(ids, vec![first, third]);
    }

    #[test]
    fn removing_unknown_signer_is_a_no_op() {
        let mut session = ComposeSession::new();
        session.add_signer();
        assert!(session.remove_signer(&SignerId("missing".into())).is_none());
        assert_eq!(session.signers().len(), 1);
    }

    #[test]
    fn update_secret_targets_one_signer() {
        let mut session = ComposeSession::new();
        let id = session.import_signer("A", "1").local_id.clone();
        session.import_signer("B", "2");

        assert!(session.update_secret(&id, "9,9"));
        assert_eq!(session.signers()[0].secret_material, "9,9");
        assert_eq!(session.signers()[1].secret_material, "2");
        assert!(!session.update_secret(&SignerId("nope".into()), "0"));
    }

    #[test]
    fn remaining_chars_counts_characters_not_bytes() {
        let mut session = ComposeSession::new();
        session.set_text("héllo");
        assert_eq!(session.char_count(), 5);
        assert_eq!(session.remaining_chars(), MAX_MEMO_CHARS - 5);

        session.set_text("x".repeat(MAX_MEMO_CHARS + 10));
        assert_eq!(session.remaining_chars(), 0);
    }

    #[test]
    fn whitespace_only_text_cannot_be_submitted() {
        let mut session = ComposeSession::new();
        assert!(!session.can_submit());
        session.set_text("   \n");
        assert!(!session.can_submit());
        session.set_text(" gm ");
        assert!(session.can_submit());
    }

    #[test]
    fn reset_clears_text_and_signers() {
        let mut session = ComposeSession::new();
        session.set_text("hello");
        session.add_signer();
        session.reset();
        assert!(session.text().is_empty());
        assert!(session.signers().is_empty());
    }
}
