// Core payroll services
pub mod approvals;
pub mod line_items;
pub mod payslips;

// Pure statutory deduction calculator
pub mod tax;
