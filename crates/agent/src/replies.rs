//! Fixed, deterministic replies.
//!
//! These are the only messages the orchestrator authors itself; every
//! other user-visible sentence comes from the model. The unknown-user
//! and medication-not-found replies are localized from the user's
//! message; the failure lines are fixed English.

use crate::language::Lang;

/// The sole reply when the identity gate misses.
pub fn unknown_user(lang: Lang, user_id: &str) -> String {
    match lang {
        Lang::Hebrew => format!(
            "לא מצאתי את המשתמש במערכת (user_id: {user_id}), ולכן לא אוכל להמשיך. \
             אם יש לך user_id אחר, שלחי/שלח אותו בבקשה."
        ),
        Lang::English => format!(
            "I couldn’t find this user in our system (user_id: {user_id}), so I can’t proceed. \
             Please provide a valid user_id."
        ),
    }
}

/// The sole reply when any tool result in the turn is a missed
/// medication lookup. The model never gets to improvise here.
pub fn medication_not_found(lang: Lang) -> &'static str {
    match lang {
        Lang::Hebrew => {
            "מצטער/ת, לא מצאתי את שם התרופה במאגר הפנימי של בית המרקחת, \
             ולכן אינני יכול/ה לספק מידע עליה. \
             אם תרצה/י, אפשר לבדוק שוב עם איות מדויק (ובאנגלית אם יש), או לציין שם מסחרי."
        }
        Lang::English => {
            "Sorry — I couldn’t find that medication in our internal pharmacy database, \
             so I can’t provide information about it. \
             If you’d like, please confirm the exact spelling (and the generic/brand name)."
        }
    }
}

/// Appended when the backend surfaces a stream-level error.
pub fn stream_failure() -> &'static str {
    "\nSorry — I encountered an error while generating the response."
}

/// Emitted when the decision output is unexpectedly empty at final-call
/// time.
pub fn missing_tool_context() -> &'static str {
    "\nSorry — internal error: missing tool call context."
}
