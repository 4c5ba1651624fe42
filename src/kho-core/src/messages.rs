// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! User-facing reply texts.

use crate::dates::format_date;
use crate::validate::{Acceptance, DatePolicy, Rejection};

pub fn rejection_reply(rejection: &Rejection) -> String {
    match rejection {
        Rejection::UnknownSite { site_id } => {
            format!("⚠️ ID kho {site_id} chưa có trong danh sách, vui lòng kiểm tra lại.")
        }
        Rejection::NameMismatch {
            site_id,
            canonical_name,
        } => format!(
            "⚠️ Tên kho không khớp với danh sách.\nTrong file là: {site_id} - {canonical_name}"
        ),
        Rejection::IncompleteSections { missing } => {
            let missing = missing
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "⚠️ Báo cáo chưa đủ 4 mục (1, 2, 3, 4), còn thiếu mục {missing}. \
                 Vui lòng kiểm tra lại cú pháp."
            )
        }
        Rejection::MissingDate => "⚠️ Báo cáo thiếu dòng ngày hoặc ngày không hợp lệ.\n\
                                   Vui lòng ghi theo mẫu: Ngày dd/mm/yyyy"
            .to_string(),
        Rejection::WrongDate { reported, today } => format!(
            "⚠️ Ngày trong báo cáo là {}, không phải hôm nay ({}).\n\
             Vui lòng gửi báo cáo của ngày hôm nay.",
            format_date(*reported),
            format_date(*today)
        ),
    }
}

pub fn acceptance_reply(acceptance: &Acceptance) -> String {
    let mut text = format!(
        "✅ ĐÃ GHI NHẬN báo cáo ngày {} của:\n{} - {}",
        format_date(acceptance.date),
        acceptance.site_id,
        acceptance.site_name
    );
    if acceptance.already_recorded {
        text.push_str("\n(Kho đã được ghi nhận trước đó trong ngày.)");
    }
    text
}

/// Reply to `/start` and `/help`.
pub fn usage_text(policy: DatePolicy) -> String {
    let mut text = String::from(
        "✅ Bot báo cáo kho Giao Hàng Nặng đang chạy.\n\
         Cú pháp báo cáo:\n\
         Dòng 1: ID_KHO - Tên kho\n",
    );
    if policy == DatePolicy::RequireToday {
        text.push_str("Dòng 2: Ngày dd/mm/yyyy (ngày hôm nay)\n");
    }
    text.push_str("Sau đó là 4 mục 1, 2, 3, 4 giống template.\n/tonghop: gửi tổng hợp ngay.");
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_incomplete_reply_lists_missing_sections() {
        let text = rejection_reply(&Rejection::IncompleteSections {
            missing: vec![2, 4],
        });
        assert!(text.contains("còn thiếu mục 2, 4"));
    }

    #[test]
    fn test_repeat_acceptance_is_noted() {
        let mut acceptance = Acceptance {
            site_id: "21163000".to_string(),
            site_name: "Kho A".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
            already_recorded: false,
        };
        let first = acceptance_reply(&acceptance);
        assert!(first.starts_with("✅ ĐÃ GHI NHẬN báo cáo ngày 02/01/2026"));
        assert!(!first.contains("trước đó"));

        acceptance.already_recorded = true;
        assert!(acceptance_reply(&acceptance).contains("trước đó"));
    }

    #[test]
    fn test_usage_mentions_date_line_only_when_required() {
        assert!(usage_text(DatePolicy::RequireToday).contains("Ngày dd/mm/yyyy"));
        assert!(!usage_text(DatePolicy::Ignore).contains("Ngày dd/mm/yyyy"));
    }
}
