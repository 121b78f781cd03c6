//! Accessors over the transport: one per data source
//!
//! None of them decides what is displayed or tracks loading; the view
//! keeps both in its state and commits accessor results only when they
//! are still relevant.

use spendview_ledger::{Employee, PageCursor, Transaction, TransactionPage, TransportError, TransportRef};
use tokio::sync::Mutex;

// ==================== Employee Directory ====================

pub struct EmployeeDirectory {
    transport: TransportRef,
}

impl EmployeeDirectory {
    pub fn new(transport: TransportRef) -> Self {
        Self { transport }
    }

    pub async fn fetch_all(&self) -> Result<Vec<Employee>, TransportError> {
        self.transport.fetch_employees().await
    }
}

// ==================== Paginated Feed ====================

#[derive(Debug, Clone, PartialEq)]
enum Position {
    Start,
    At(PageCursor),
    Exhausted,
}

struct FeedCursor {
    /// Filter epoch the position belongs to
    epoch: u64,
    position: Position,
    last_page: Option<TransactionPage>,
}

impl FeedCursor {
    fn start(epoch: u64) -> Self {
        Self {
            epoch,
            position: Position::Start,
            last_page: None,
        }
    }
}

/// Walks the unfiltered feed one page at a time.
///
/// Page fetches are serialized on the cursor lock, so concurrent
/// callers each receive the next page and none is skipped. After the
/// last page, further calls return that page again without a request.
///
/// The cursor is bound to a filter epoch. A call from a newer epoch
/// starts over from the first page; a call from an older one is refused
/// without a request and leaves the cursor where it is.
pub struct PaginatedFeed {
    transport: TransportRef,
    cursor: Mutex<FeedCursor>,
}

impl PaginatedFeed {
    pub fn new(transport: TransportRef) -> Self {
        Self {
            transport,
            cursor: Mutex::new(FeedCursor::start(0)),
        }
    }

    /// Next page for `epoch`, or `None` when the cursor has moved to a
    /// newer epoch
    pub async fn fetch_next_page(&self, epoch: u64) -> Result<Option<TransactionPage>, TransportError> {
        let mut cursor = self.cursor.lock().await;
        if epoch < cursor.epoch {
            return Ok(None);
        }
        if epoch > cursor.epoch {
            *cursor = FeedCursor::start(epoch);
        }

        let request = match (&cursor.position, &cursor.last_page) {
            (Position::Exhausted, Some(page)) => return Ok(Some(page.clone())),
            (Position::At(next), _) => Some(next.clone()),
            _ => None,
        };

        let page = self.transport.fetch_transactions_page(request.as_ref()).await?;

        cursor.position = match &page.next_cursor {
            Some(next) => Position::At(next.clone()),
            None => Position::Exhausted,
        };
        cursor.last_page = Some(page.clone());
        Ok(Some(page))
    }

    /// Forget the position and claim the cursor for `epoch`; the next
    /// fetch starts from the first page and older epochs are refused
    pub async fn invalidate(&self, epoch: u64) {
        let mut cursor = self.cursor.lock().await;
        *cursor = FeedCursor::start(epoch.max(cursor.epoch));
    }
}

// ==================== Per-Employee Feed ====================

pub struct EmployeeFeed {
    transport: TransportRef,
}

impl EmployeeFeed {
    pub fn new(transport: TransportRef) -> Self {
        Self { transport }
    }

    /// Fetch the full list for one employee
    pub async fn fetch_for_employee(&self, employee_id: &str) -> Result<Vec<Transaction>, TransportError> {
        self.transport.fetch_transactions_by_employee(employee_id).await
    }
}
