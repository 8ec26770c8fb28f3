//! Последовательность запросов для одной строки формы
//!
//! Каждое изменение строки выдаёт новый токен; ответ применяется только если
//! его токен всё ещё последний. Так выигрывает последнее изменение, даже если
//! ответы пришли не в порядке отправки.

/// Токен отдельного запроса
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    latest: u64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Выдать новый токен; все ранее выданные становятся устаревшими
    pub fn issue(&mut self) -> RequestToken {
        self.latest += 1;
        RequestToken(self.latest)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_token_is_current() {
        let mut seq = RequestSequencer::new();
        let first = seq.issue();
        assert!(seq.is_current(first));

        let second = seq.issue();
        assert!(!seq.is_current(first));
        assert!(seq.is_current(second));
        assert!(second.value() > first.value());
    }

    #[test]
    fn test_sequencers_are_independent() {
        let mut row_a = RequestSequencer::new();
        let mut row_b = RequestSequencer::new();
        let a = row_a.issue();
        let _ = row_b.issue();
        let _ = row_b.issue();
        assert!(row_a.is_current(a));
    }
}
