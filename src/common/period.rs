// src/common/period.rs
//
// Aritmética de meses. Todo o motor trabalha com "mês de referência" =
// dia 1 do mês; parcelas são mês-da-primeira + offset.

use chrono::{Datelike, Months, NaiveDate};

/// Dia 1 do mês da data informada.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    // with_day(1) nunca falha para dia 1
    date.with_day(1).unwrap_or(date)
}

/// Mês de referência deslocado `offset` meses para frente.
pub fn add_months(month: NaiveDate, offset: u32) -> NaiveDate {
    first_of_month(month + Months::new(offset))
}

/// Mês de referência deslocado `offset` meses para trás.
pub fn sub_months(month: NaiveDate, offset: u32) -> NaiveDate {
    first_of_month(month - Months::new(offset))
}

/// Quantos meses de calendário o intervalo [start, end] cobre (inclusivo).
/// Janela invertida conta como 0.
pub fn months_in_window(start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }
    let span = (end.year() - start.year()) * 12 + (end.month() as i32 - start.month() as i32);
    (span + 1) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn first_of_month_zera_o_dia() {
        assert_eq!(first_of_month(d(2026, 8, 30)), d(2026, 8, 1));
    }

    #[test]
    fn add_months_atravessa_a_virada_do_ano() {
        assert_eq!(add_months(d(2026, 11, 1), 3), d(2027, 2, 1));
        assert_eq!(sub_months(d(2026, 1, 1), 2), d(2025, 11, 1));
    }

    #[test]
    fn months_in_window_conta_inclusivo() {
        assert_eq!(months_in_window(d(2026, 6, 1), d(2026, 8, 31)), 3);
        assert_eq!(months_in_window(d(2026, 8, 1), d(2026, 8, 31)), 1);
        assert_eq!(months_in_window(d(2026, 9, 1), d(2026, 8, 1)), 0);
    }
}
