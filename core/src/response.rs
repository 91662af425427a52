//! Response envelope returned to replicas.

/// A batch of committed transaction data for one resource.
///
/// The master does not stream changes to replicas yet; this is the slot a
/// response carries them in once it does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionStream {
    transactions: Vec<Vec<u8>>,
}

impl TransactionStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transactions(transactions: Vec<Vec<u8>>) -> Self {
        Self { transactions }
    }

    pub fn transactions(&self) -> &[Vec<u8>] {
        &self.transactions
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// A value returned by the master together with the changes the replica
/// should apply before using it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response<T> {
    value: T,
    stream: TransactionStream,
}

impl<T> Response<T> {
    /// Wrap a value with an empty change stream.
    pub fn new(value: T) -> Self {
        Self {
            value,
            stream: TransactionStream::new(),
        }
    }

    pub fn with_stream(value: T, stream: TransactionStream) -> Self {
        Self { value, stream }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn stream(&self) -> &TransactionStream {
        &self.stream
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn into_parts(self) -> (T, TransactionStream) {
        (self.value, self.stream)
    }
}
