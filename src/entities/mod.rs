pub mod employee;
pub mod payslip;
pub mod payslip_audit;
pub mod payslip_line_item;
